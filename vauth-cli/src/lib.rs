//! # vauth-cli
//!
//! Operator tool for minting and inspecting vauth bearer tokens.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `vauth issue --claim k=v` | Sign a token with arbitrary claims |
//! | `vauth external-login <email> <user-id>` | Sign an external-login token |
//! | `vauth validate <token>` | Check a token against the configured policy |
//! | `vauth claims <token>` | Print the claims of a valid token |
//! | `vauth login-info <token>` | Print the email and user id a token was issued for |
//! | `vauth check` | Report missing or invalid `jwt_token` config keys |
//!
//! Every command reads the `jwt_token` section through the layered
//! configuration (`application.yaml`, profile overrides, `.env`, environment).

pub mod commands;
