mod scoring;
mod session;
mod tenant;
