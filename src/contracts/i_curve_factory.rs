use ethers::prelude::abigen;

abigen!(
    ICurveFactory,
    r#"[
        function find_pool_for_coins(address _from, address _to) external view returns (address)
        function get_coin_indices(address _pool, address _from, address _to) external view returns (int128, int128)
    ]"#
);
