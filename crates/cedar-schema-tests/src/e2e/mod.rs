mod photo_app;
mod scenarios;
