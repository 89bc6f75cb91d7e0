pub fn app() -> RouteTable<Handler> {
    RouteTable::new()
        .with(HttpMethod::Get, "/reports", vec![reports::index])
        .with(HttpMethod::Get, "/reports/:year", vec![reports::by_year])
}
