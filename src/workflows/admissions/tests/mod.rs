mod common;
mod routing;
mod slots;
