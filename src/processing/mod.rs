pub mod parser;

pub use parser::{
    is_bssid, parse_airport_listing, parse_airport_scan, parse_readings, parse_readings_json,
    ParseError,
};
