fn main() -> anyhow::Result<()> {
    vesper_lib::run()
}
