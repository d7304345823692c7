// Tables are created at runtime (see `db::init` and the security repository),
// so this schema is maintained by hand rather than generated.

diesel::table! {
    #[sql_name = "SECURITY"]
    security (exchange, code) {
        exchange -> Text,
        code -> Text,
        name -> Text,
        board -> Text,
    }
}

diesel::table! {
    #[sql_name = "_secmaster_tables"]
    table_registry (name) {
        name -> Text,
        created_at -> Text,
    }
}
