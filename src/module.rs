//! Behavior of the basic module, free of any ABI concerns.

pub fn numeric_method(arg: f64) -> f64 {
    arg
}

pub fn boolean_method(arg: bool) -> bool {
    arg
}

pub fn string_method(arg: String) -> String {
    arg
}
