//! Best-effort coercion of device responses.
//!
//! The Model 331 answers a reading query with numeric text such as `+023.45`
//! while a sensor is healthy, but with free text (e.g. `No Reading`) when the
//! input is open or overloaded. A typed read therefore yields either the
//! converted value or the untouched response, never a parse error.

/// Outcome of a typed read.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading<T> {
    /// The response converted to the requested type.
    Value(T),
    /// The response as received, because it did not convert.
    Raw(String),
}

impl<T: FromResponse> Reading<T> {
    /// Convert `response`, keeping it unchanged if the conversion fails.
    pub fn coerce(response: String) -> Self {
        match T::from_response(&response) {
            Some(value) => Reading::Value(value),
            None => {
                log::debug!("Keeping raw response {response:?}, not convertible");
                Reading::Raw(response)
            }
        }
    }
}

impl<T> Reading<T> {
    /// Whether the response converted.
    pub fn is_value(&self) -> bool {
        matches!(self, Reading::Value(_))
    }

    /// The converted value, if there is one.
    pub fn value(self) -> Option<T> {
        match self {
            Reading::Value(value) => Some(value),
            Reading::Raw(_) => None,
        }
    }

    /// The unconverted response, if conversion failed.
    pub fn raw(&self) -> Option<&str> {
        match self {
            Reading::Value(_) => None,
            Reading::Raw(raw) => Some(raw),
        }
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Reading<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reading::Value(value) => write!(f, "{value}"),
            Reading::Raw(raw) => write!(f, "{raw}"),
        }
    }
}

/// Types a response string can be coerced into.
pub trait FromResponse: Sized {
    /// `None` when `response` does not represent a value of this type.
    fn from_response(response: &str) -> Option<Self>;
}

impl FromResponse for String {
    fn from_response(response: &str) -> Option<Self> {
        Some(response.to_string())
    }
}

macro_rules! float_from_response {
    ($($t:ty),*) => {$(
        impl FromResponse for $t {
            fn from_response(response: &str) -> Option<Self> {
                response.trim().parse().ok()
            }
        }
    )*};
}

float_from_response!(f32, f64);

// Integers go through a decimal intermediate so `+023.45` becomes 23.
macro_rules! int_from_response {
    ($($t:ty),*) => {$(
        impl FromResponse for $t {
            fn from_response(response: &str) -> Option<Self> {
                let text = response.trim();
                if let Ok(value) = text.parse::<$t>() {
                    return Some(value);
                }
                let value = text.parse::<f64>().ok()?.trunc();
                if !value.is_finite() {
                    return None;
                }
                // Exact for every finite f64 in range; saturates far outside it.
                <$t>::try_from(value as i128).ok()
            }
        }
    )*};
}

int_from_response!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize);
