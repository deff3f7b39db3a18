diesel::table! {
    orders (id) {
        id -> Text,
        created_at -> Int8,
        updated_at -> Int8,
        user_id -> Text,
        status -> Text,
        total_amount -> Int8,
        currency -> Text,
        shipping_address -> Text,
        customer_details -> Text,
        payment_status -> Text,
        payment_id -> Nullable<Text>,
        payment_mode -> Nullable<Text>,
        transaction_id -> Nullable<Text>,
        payment_error -> Nullable<Text>,
    }
}

diesel::table! {
    order_items (id) {
        id -> Int4,
        order_id -> Text,
        product_id -> Text,
        product_name -> Text,
        unit_price -> Int8,
        quantity -> Int4,
    }
}

diesel::joinable!(order_items -> orders (order_id));

diesel::allow_tables_to_appear_in_same_query!(orders, order_items);
