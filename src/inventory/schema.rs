diesel::table! {
    inventory_table (id) {
        id -> Integer,
        #[sql_name = "Location_Name"]
        location_name -> Nullable<Text>,
        #[sql_name = "Address"]
        address -> Nullable<Text>,
        #[sql_name = "City"]
        city -> Nullable<Text>,
        #[sql_name = "Province"]
        province -> Nullable<Text>,
        #[sql_name = "Latitude"]
        latitude -> Nullable<Double>,
        #[sql_name = "Longitude"]
        longitude -> Nullable<Double>,
    }
}
