mod atlas;
mod extract;
