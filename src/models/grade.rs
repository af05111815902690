/// Fuel grade sold at a station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grade {
    Regular,
    Premium,
    Diesel,
}

impl Grade {
    /// Parse a grade name, ignoring case. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "regular" => Some(Grade::Regular),
            "premium" => Some(Grade::Premium),
            "diesel" => Some(Grade::Diesel),
            _ => None,
        }
    }
}
