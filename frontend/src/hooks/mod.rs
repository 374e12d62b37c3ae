pub mod use_active_baby;
pub mod use_entity_list;
pub mod use_session_expiry;
pub mod use_wake_polling;
