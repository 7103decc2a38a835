mod navigation;
mod palette;
