fn main() -> anyhow::Result<()> {
    sfhelper_cli::main()
}
