// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod analytics;
pub mod edit;
pub mod error;
pub mod fetcher;
pub mod ids;
pub mod model;
pub mod pointer;
pub mod selection;
pub mod session;
pub mod timers;

pub use error::*;
pub use ids::*;
pub use model::*;
pub use session::*;
