//! Markets module - market kinds, trading hours, market services and the registry.

mod markets_model;
mod markets_registry;
mod markets_service;
mod markets_traits;

#[cfg(test)]
mod markets_service_tests;

pub use markets_model::{MarketKind, TradingHours, TradingSession};
pub use markets_registry::MarketRegistry;
pub use markets_service::{MarketService, UpstreamPipelineFactory};
pub use markets_traits::{MarketServiceTrait, PipelineFactory};
