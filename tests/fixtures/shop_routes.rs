use crate::handlers::{cart, products};
use openapi_from_routes::route_table::RouteTable;

const CART_BASE: &str = "/cart";

pub fn build() -> RouteTable<Handler> {
    let mut router = RouteTable::new();

    router.get("/", vec![products::index]);
    router.get("/products/:id", vec![products::show]);
    router.post(r"/products", vec![auth, products::create]);
    router.delete("/products/{id}", vec![auth, products::destroy]);
    router.put(&format!("{}/items", CART_BASE), vec![cart::replace]);

    router
}
