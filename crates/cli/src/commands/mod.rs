pub(crate) mod states;
pub(crate) mod transition;
