mod distribute_tests;
mod generate_tests;
mod show_tests;
