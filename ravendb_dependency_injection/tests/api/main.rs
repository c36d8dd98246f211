mod document_store;
mod helpers;
mod options;
mod sessions;
