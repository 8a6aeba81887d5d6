pub use env_vars::EnvVars;

mod env_vars;
