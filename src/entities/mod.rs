// ABOUTME: SeaORM entities for the document store collections
// ABOUTME: Users are flat records; photos embed their ordered comment list

pub mod photo;
pub mod user;
