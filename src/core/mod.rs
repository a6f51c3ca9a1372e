// Core modules: records, validation, merge/filter policy, overlay storage, errors.
pub mod error;
pub mod filter;
pub mod merge;
pub mod overlay;
pub mod record;
pub mod validate;
