mod common;
mod form;
mod routing;
