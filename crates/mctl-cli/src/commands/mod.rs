pub(crate) mod projects;
pub(crate) mod rules;
pub(crate) mod static_routes;
