use ethers::prelude::abigen;

abigen!(
    ICurvePool,
    r#"[
        function get_dy(int128 i, int128 j, uint256 dx) external view returns (uint256)
        function exchange(int128 i, int128 j, uint256 dx, uint256 min_dy) external returns (uint256)
    ]"#
);
