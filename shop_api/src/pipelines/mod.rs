// shop_api/src/pipelines/mod.rs

//! The application's step pipelines. They are built once at startup and shared
//! through `AppState`.

use crate::errors::AppError;
use checkout_core::Pipeline;
use tracing::info;

pub mod common_steps;
pub mod complete_checkout_pipeline;
pub mod contexts;
pub mod login_pipeline;
pub mod register_pipeline;

use contexts::{CompleteCheckoutCtxData, LoginCtxData, RegisterCtxData};

pub struct Pipelines {
  pub complete_checkout: Pipeline<CompleteCheckoutCtxData, AppError>,
  pub register: Pipeline<RegisterCtxData, AppError>,
  pub login: Pipeline<LoginCtxData, AppError>,
}

impl Pipelines {
  pub fn build() -> Self {
    let pipelines = Self {
      complete_checkout: complete_checkout_pipeline::build_complete_checkout_pipeline(),
      register: register_pipeline::build_register_pipeline(),
      login: login_pipeline::build_login_pipeline(),
    };
    info!(
      complete_checkout = ?pipelines.complete_checkout.step_names(),
      "Application pipelines built."
    );
    pipelines
  }
}
