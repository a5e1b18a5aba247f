//! Utility functions and types

pub mod data_loader;
pub mod io;

pub use data_loader::{read_csv, write_csv};
pub use io::{
    create_parent_dir, decode_object, encode_object, load_array, load_object, save_array,
    save_object, write_json_report,
};
