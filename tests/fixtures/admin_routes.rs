use std::sync::{LazyLock, Mutex};

pub static ADMIN: LazyLock<Mutex<RouteTable<Handler>>> = LazyLock::new(Default::default);

pub fn install() {
    let mut admin = ADMIN.lock().unwrap();
    ADMIN.patch("/admin/settings", vec![settings::update]);
    admin.get("/admin/ignored", vec![settings::show]);
}
