use actix_web::web;

pub mod alerts;
pub mod chat;
pub mod dashboard;
pub mod devices;
pub mod documents;
pub mod rpc;
pub mod sensors;
pub mod tiles;
pub mod users;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/trpc")
            .service(dashboard::healthcheck)
            // Users
            .service(users::create_user)
            .service(users::get_users)
            .service(users::update_user)
            // Devices
            .service(devices::create_device)
            .service(devices::get_devices)
            .service(devices::update_device)
            // Sensors and readings
            .service(sensors::create_sensor)
            .service(sensors::get_sensors)
            .service(sensors::create_sensor_reading)
            .service(sensors::get_sensor_readings)
            // Documents
            .service(documents::upload_document)
            .service(documents::get_documents)
            .service(documents::process_document)
            // Chat
            .service(chat::create_chat_conversation)
            .service(chat::get_chat_conversations)
            .service(chat::create_chat_message)
            .service(chat::get_chat_messages)
            .service(chat::chat_query)
            // Dashboard tiles
            .service(tiles::create_dashboard_tile)
            .service(tiles::get_dashboard_tiles)
            .service(tiles::update_dashboard_tile)
            .service(tiles::delete_dashboard_tile)
            // Alerts
            .service(alerts::create_alert)
            .service(alerts::get_alerts)
            .service(alerts::acknowledge_alert)
            .service(alerts::resolve_alert)
            // Dashboard
            .service(dashboard::get_dashboard_stats)
            .service(dashboard::export_dashboard),
    );
}
