pub mod changelog;
pub mod commit;
pub mod sync;
