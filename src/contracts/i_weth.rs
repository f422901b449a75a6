use ethers::prelude::abigen;

abigen!(
    IWETH,
    r#"[
        function deposit() external payable
        function withdraw(uint256 wad) external
        function approve(address guy, uint256 wad) external returns (bool)
        function balanceOf(address guy) external view returns (uint256)
    ]"#
);
