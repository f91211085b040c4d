//! Reading and writing whitespace-delimited text files

mod reader;
mod writer;

pub use reader::{parse_dataset, read_dataset, read_headers};
pub use writer::{
    ensure_output_dir, write_gridlist, write_gridlist_to, write_idw_mappings,
    write_idw_mappings_to, write_nn_mappings, write_nn_mappings_to, write_regridded,
    write_regridded_to,
};
