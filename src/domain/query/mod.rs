pub mod parser;
pub mod result;

pub use parser::{
    parse_list_query, ListParams, ListQueryConfig, ListQueryError, DEFAULT_PAGE, DEFAULT_SIZE,
    MAX_SIZE,
};
pub use result::ListResult;
