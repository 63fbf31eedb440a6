// shop_api/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{auth_handlers, cart_handlers, checkout_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Mounts the shop API under `/shop-api`.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/shop-api")
      .route("/health", web::get().to(health_check_handler))
      .route("/login", web::post().to(auth_handlers::login_handler))
      .route("/{channel}/register", web::post().to(auth_handlers::register_handler))
      // Cart
      .service(
        web::resource("/{channel}/carts/{token}")
          .route(web::post().to(cart_handlers::pickup_cart_handler))
          .route(web::get().to(cart_handlers::get_cart_handler)),
      )
      .route(
        "/{channel}/carts/{token}/items",
        web::post().to(cart_handlers::add_item_handler),
      )
      .service(
        web::resource("/{channel}/carts/{token}/items/{product_code}")
          .route(web::put().to(cart_handlers::change_item_quantity_handler))
          .route(web::delete().to(cart_handlers::remove_item_handler)),
      )
      // Checkout
      .route(
        "/{channel}/checkout/{token}",
        web::get().to(checkout_handlers::get_checkout_handler),
      )
      .route(
        "/{channel}/checkout/{token}/address",
        web::put().to(checkout_handlers::address_handler),
      )
      .route(
        "/{channel}/checkout/{token}/shipping",
        web::get().to(checkout_handlers::shipping_methods_handler),
      )
      .route(
        "/{channel}/checkout/{token}/shipping/{shipment_id}",
        web::put().to(checkout_handlers::choose_shipping_method_handler),
      )
      .route(
        "/{channel}/checkout/{token}/payment",
        web::get().to(checkout_handlers::payment_methods_handler),
      )
      .route(
        "/{channel}/checkout/{token}/payment/{payment_id}",
        web::put().to(checkout_handlers::choose_payment_method_handler),
      )
      .route(
        "/{channel}/checkout/{token}/complete",
        web::put().to(checkout_handlers::complete_checkout_handler),
      ),
  );
}
