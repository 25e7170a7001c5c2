// Hand-maintained to match migrations/; no `diesel print-schema` run in
// this environment.

diesel::table! {
    opportunities (id) {
        id -> Integer,
        ts -> Text,
        route_type -> Text,
        route_label -> Text,
        buy_exchange -> Text,
        sell_exchange -> Text,
        spread_pct -> Text,
        buy_rate -> Text,
        sell_rate -> Text,
        cross_rate -> Nullable<Text>,
        qty_a -> Text,
        qty_b -> Text,
        executed -> Bool,
        dry_run -> Bool,
    }
}

diesel::table! {
    orders (id) {
        id -> Integer,
        ts -> Text,
        market -> Text,
    }
}

diesel::table! {
    order_details (id) {
        id -> Integer,
        order_id -> Integer,
        volume -> Text,
        rate -> Text,
        orig_id -> Text,
        exchange -> Text,
        side -> Text,
    }
}

diesel::table! {
    balances (id) {
        id -> Integer,
        currency -> Text,
        balance -> Text,
        ts -> Text,
    }
}

diesel::joinable!(order_details -> orders (order_id));
diesel::allow_tables_to_appear_in_same_query!(balances, opportunities, order_details, orders,);
