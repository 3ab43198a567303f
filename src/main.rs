fn main() -> anyhow::Result<()> {
    eyesense_lib::run()
}
