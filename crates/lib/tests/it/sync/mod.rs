mod freshness;
mod update_settings;
