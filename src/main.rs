fn main() {
    delivery_state::app::startup::startup();
}
