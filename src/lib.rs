pub mod constants;
pub mod elements;
pub mod ephemeris;
pub mod geo;
pub mod local;
pub mod lunation;
pub mod path;
pub mod search;
pub mod time;
pub mod umbra_errors;
