diesel::table! {
    person_details (id) {
        id -> Integer,
        data -> Text,
    }
}
