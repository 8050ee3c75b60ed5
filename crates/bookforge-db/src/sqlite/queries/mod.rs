mod api_keys;
mod books;
mod preferences;
