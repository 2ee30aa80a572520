use diesel::sql_types::{Cidr, Int8};

// The zero-length default route must not reach any derived table, and it is
// cheapest to drop it where the rows are read.
diesel::sql_function! { fn masklen(x: Cidr) -> Int8; }
