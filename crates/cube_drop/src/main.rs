fn main() {
    cube_drop::run();
}
