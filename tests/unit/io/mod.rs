mod legacy;
mod progress;
