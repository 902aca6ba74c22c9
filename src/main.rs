fn main() -> anyhow::Result<()> {
    let command_line_interface = nodegen::cli::CommandLineInterface::load();
    command_line_interface.run()
}
