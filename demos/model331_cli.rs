use clap::{Parser, Subcommand};
use std::{path::PathBuf, time::Duration};

use lakeshore331::{Input, Measurement, Model331, SerialConfig};

#[derive(Parser)]
struct Args {
    device: PathBuf,
    #[arg(default_value_t = 9600)]
    baud_rate: u32,
    #[arg(long, default_value_t = 15)]
    timeout_secs: u64,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Identify,
    Kelvin {
        input: Input,
        #[arg(long)]
        float: bool,
    },
    Celsius {
        input: Input,
        #[arg(long)]
        float: bool,
    },
    Sensor {
        input: Input,
        #[arg(long)]
        float: bool,
    },
    Send {
        command: String,
    },
}

fn read(controller: &mut Model331, measurement: Measurement, input: Input, float: bool) {
    if float {
        let reading = controller.read_value::<f64>(measurement, input).unwrap();
        println!("{reading}");
    } else {
        println!("{}", controller.read_raw(measurement, input).unwrap());
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = SerialConfig::new(args.device.as_path().to_str().unwrap())
        .with_baud_rate(args.baud_rate)
        .with_timeout(Duration::from_secs(args.timeout_secs));
    let mut controller = Model331::open(config).unwrap();

    match args.command {
        Commands::Identify => println!("{}", controller.identify().unwrap()),
        Commands::Kelvin { input, float } => {
            read(&mut controller, Measurement::Kelvin, input, float)
        }
        Commands::Celsius { input, float } => {
            read(&mut controller, Measurement::Celsius, input, float)
        }
        Commands::Sensor { input, float } => {
            read(&mut controller, Measurement::SensorUnits, input, float)
        }
        Commands::Send { command } => println!("{}", controller.send_command(&command).unwrap()),
    }
    controller.close();
}
