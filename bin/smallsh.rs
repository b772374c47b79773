fn main() {
    smallsh::main()
}
