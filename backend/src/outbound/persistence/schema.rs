//! Diesel table definitions. Must match `backend/migrations`.

diesel::table! {
    /// Registered users. `email` carries a unique index; `updated_at` is
    /// maintained by a trigger.
    users (id) {
        id -> Int4,
        name -> Varchar,
        lastname -> Varchar,
        age -> Int4,
        email -> Varchar,
        /// Argon2 PHC string.
        password -> Varchar,
        address -> Jsonb,
        genero -> Varchar,
        fecha -> Timestamptz,
        estado -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
