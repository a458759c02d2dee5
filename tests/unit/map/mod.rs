mod animation;
